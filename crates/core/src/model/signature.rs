use serde::{Deserialize, Serialize};

/// A method descriptor of the form `ReturnType ClassName.methodName(ParamType, ...)`,
/// split into its components.
///
/// Parsing is total: components that are absent from the text come out as
/// empty strings rather than failing, since descriptors arrive from
/// arbitrary uploaded files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub return_type: String,
    pub class_name: String,
    pub method_name: String,
    /// Parameter type names, in declaration order.
    pub parameters: Vec<String>,
}

impl MethodSignature {
    /// Parse a raw descriptor.
    ///
    /// The text before the first `(` splits at its last dot-or-whitespace
    /// boundary into qualifier and method name; the qualifier splits at its
    /// last whitespace into return type and class name; the parenthesized
    /// tail splits on plain commas into parameter types.
    pub fn parse(descriptor: &str) -> Self {
        let (head, tail) = match descriptor.find('(') {
            Some(pos) => (&descriptor[..pos], &descriptor[pos + 1..]),
            None => (descriptor, ""),
        };
        let params_text = match tail.find(')') {
            Some(pos) => &tail[..pos],
            None => tail,
        };
        let parameters: Vec<String> = params_text
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();

        let head = head.trim();
        let (qualifier, method_name) = match split_at_last(head, |c| c == '.' || c.is_whitespace())
        {
            Some((before, after)) => (before.trim(), after),
            None => ("", head),
        };
        let (return_type, class_name) = match split_at_last(qualifier, char::is_whitespace) {
            Some((before, after)) => (before.trim(), after.trim()),
            None => ("", qualifier),
        };

        Self {
            return_type: return_type.to_string(),
            class_name: class_name.to_string(),
            method_name: method_name.to_string(),
            parameters,
        }
    }

    /// `ClassName.methodName`, or just the method name when no class is known.
    pub fn qualified_name(&self) -> String {
        if self.class_name.is_empty() {
            self.method_name.clone()
        } else {
            format!("{}.{}", self.class_name, self.method_name)
        }
    }
}

/// Split around the last character matching `pred`, excluding the boundary
/// character itself. Boundary characters may be multi-byte whitespace.
fn split_at_last(text: &str, pred: impl Fn(char) -> bool) -> Option<(&str, &str)> {
    let (pos, boundary) = text.char_indices().filter(|&(_, c)| pred(c)).next_back()?;
    Some((&text[..pos], &text[pos + boundary.len_utf8()..]))
}
