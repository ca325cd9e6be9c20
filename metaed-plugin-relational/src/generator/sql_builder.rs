//! Line-oriented SQL text builder.

/// Builds SQL scripts with four-space indentation.
///
/// ```ignore
/// let mut sql = SqlBuilder::new();
/// sql.push_line("CREATE TABLE edfi.school (")
///     .push_indent()
///     .push_line("schoolid INT NOT NULL")
///     .push_dedent()
///     .push_line(");");
/// assert_eq!(sql.build(), "CREATE TABLE edfi.school (\n    schoolid INT NOT NULL\n);\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SqlBuilder {
    indent_level: usize,
    buffer: String,
}

impl SqlBuilder {
    const INDENT: &'static str = "    ";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) -> &mut Self {
        for _ in 0..self.indent_level {
            self.buffer.push_str(Self::INDENT);
        }
        self.buffer.push_str(line);
        self.buffer.push('\n');
        self
    }

    /// Push `lines` with a comma after every line but the last.
    pub fn push_list<I>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = String>,
    {
        let lines: Vec<String> = lines.into_iter().collect();
        let last = lines.len().saturating_sub(1);
        for (i, line) in lines.iter().enumerate() {
            if i == last {
                self.push_line(line);
            } else {
                self.push_line(&format!("{line},"));
            }
        }
        self
    }

    pub fn push_blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    pub fn push_indent(&mut self) -> &mut Self {
        self.indent_level += 1;
        self
    }

    pub fn push_dedent(&mut self) -> &mut Self {
        self.indent_level = self.indent_level.saturating_sub(1);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn build(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_commas() {
        let mut sql = SqlBuilder::new();
        sql.push_line("(")
            .push_indent()
            .push_list(["a INT".to_string(), "b INT".to_string()])
            .push_dedent()
            .push_line(");");
        assert_eq!(sql.build(), "(\n    a INT,\n    b INT\n);\n");
    }

    #[test]
    fn test_dedent_saturates() {
        let mut sql = SqlBuilder::new();
        sql.push_dedent().push_line("GO");
        assert_eq!(sql.build(), "GO\n");
    }
}
