/// Configuration parsed from the grammar file's `%%`-prefixed pragma lines.
///
/// The lines are concatenated (each stripped of its leading `%%`) and the
/// result is parsed as a TOML document. Recognised keys are a per-function
/// return type and a per-function local-variable type-annotation table;
/// unknown keys are kept and passed through without effect.
#[derive(Debug, Clone, Default)]
pub struct Pragmas {
    table: toml::Table,
}

impl Pragmas {
    pub fn empty() -> Self {
        Self { table: toml::Table::new() }
    }

    /// Per-function return type annotation, e.g. `[return] S = "ExprNode"`.
    pub fn return_type(&self, function: &str) -> Option<&str> {
        self.table
            .get("return")
            .and_then(|v| v.as_table())
            .and_then(|t| t.get(function))
            .and_then(|v| v.as_str())
    }

    /// Per-function local variable type annotation, e.g.
    /// `[types.S] x = "int"`.
    pub fn local_type(&self, function: &str, local: &str) -> Option<&str> {
        self.table
            .get("types")
            .and_then(|v| v.as_table())
            .and_then(|t| t.get(function))
            .and_then(|v| v.as_table())
            .and_then(|t| t.get(local))
            .and_then(|v| v.as_str())
    }
}

/// Concatenate `%%`-prefixed lines (already stripped of the prefix, one
/// fragment per line) and parse the result as TOML.
pub fn parse_pragmas(lines: &[String]) -> Result<Pragmas, toml::de::Error> {
    if lines.is_empty() {
        return Ok(Pragmas::empty());
    }
    let joined = lines.join("\n");
    let table: toml::Table = toml::from_str(&joined)?;
    Ok(Pragmas { table })
}
