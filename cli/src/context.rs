//! A filesystem-backed rendering context: locals come from the command
//! line, partials are `.bd` files under the templates directory.

use std::path::PathBuf;

use serde_json::{Map, Value};

use renderer::{OutputFormat, RenderError, RenderingContext};

/// Resolves `render` composition against template files on disk. The
/// partial named `users/user` maps to `<templates_dir>/users/_user.bd`;
/// each partial renders in a fresh context carrying only the locals the
/// caller merged for it.
pub struct FileContext {
    templates_dir: PathBuf,
    locals: Map<String, Value>,
}

impl FileContext {
    pub fn new(templates_dir: PathBuf, locals: Map<String, Value>) -> Self {
        FileContext {
            templates_dir,
            locals,
        }
    }

    fn partial_path(&self, name: &str) -> PathBuf {
        match name.rsplit_once('/') {
            Some((dir, base)) => self.templates_dir.join(dir).join(format!("_{}.bd", base)),
            None => self.templates_dir.join(format!("_{}.bd", name)),
        }
    }
}

impl RenderingContext for FileContext {
    fn local(&self, name: &str) -> Option<Value> {
        self.locals.get(name).cloned()
    }

    fn has_capability(&self, _name: &str) -> bool {
        false
    }

    fn call_capability(
        &mut self,
        name: &str,
        _args: &[Value],
        _kwargs: &Map<String, Value>,
    ) -> Result<Value, RenderError> {
        Err(RenderError::NoCapability(name.to_string()))
    }

    fn render_partial(
        &mut self,
        name: &str,
        locals: &Map<String, Value>,
        format: OutputFormat,
    ) -> Result<String, RenderError> {
        let path = self.partial_path(name);
        let source = std::fs::read_to_string(&path).map_err(|e| {
            RenderError::Custom(format!("cannot read partial '{}': {}", path.display(), e))
        })?;

        let mut sub = FileContext::new(self.templates_dir.clone(), locals.clone());
        let document = renderer::render(&source, Some(format), &mut sub, 0)
            .map_err(|e| RenderError::Custom(format!("in partial '{}': {}", name, e)))?;

        serde_json::to_string(&document).map_err(|e| RenderError::Custom(e.to_string()))
    }
}
