/// Removes `//` and `/* */` comments, keeping line breaks so line numbers hold.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_block = false;

    while let Some(ch) = chars.next() {
        if in_block {
            if ch == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block = false;
            } else if ch == '\n' {
                out.push('\n');
            }
            continue;
        }
        match (ch, chars.peek().copied()) {
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                in_block = true;
            }
            _ => out.push(ch),
        }
    }
    out
}

/// A single-line `uniform` declaration, e.g.
/// `layout(binding = 0) uniform highp sampler2D state;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDeclaration<'a> {
    pub ty: &'a str,
    pub names: Vec<&'a str>,
}

/// Parses one line as a `uniform` declaration.
///
/// A leading `layout(...)` qualifier and precision qualifiers are skipped.
/// Returns `None` for anything else, including lines with code after the `;`.
pub fn parse_uniform_declaration(line: &str) -> Option<UniformDeclaration<'_>> {
    let line = skip_layout_qualifier(line.trim())?;
    let rest = line.strip_prefix("uniform")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let (declaration, trailing) = match rest.split_once(';') {
        Some((declaration, trailing)) => (declaration, trailing.trim()),
        None => (rest, ""),
    };
    if !(trailing.is_empty() || trailing.starts_with("//") || trailing.starts_with("/*")) {
        return None;
    }

    let mut declaration = declaration.trim_start();
    let (ty, names) = loop {
        let (head, tail) = declaration.split_once(char::is_whitespace)?;
        if matches!(head, "lowp" | "mediump" | "highp") {
            declaration = tail.trim_start();
            continue;
        }
        break (head, tail);
    };
    let names: Vec<&str> = names
        .split(',')
        .map(str::trim)
        .collect();
    if names.iter().any(|name| !is_identifier(name)) {
        return None;
    }
    Some(UniformDeclaration { ty, names })
}

fn skip_layout_qualifier(line: &str) -> Option<&str> {
    let Some(rest) = line.strip_prefix("layout") else {
        return Some(line);
    };
    let rest = rest.trim_start().strip_prefix('(')?;
    let close = rest.find(')')?;
    Some(rest[close + 1..].trim_start())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(first) if first == '_' || first.is_ascii_alphabetic())
        && chars.all(|ch| ch == '_' || ch.is_ascii_alphanumeric())
}

/// True when the shader declares a `uniform sampler2D` outside of comments.
pub fn declares_state_sampler(source: &str) -> bool {
    strip_comments(source)
        .lines()
        .filter_map(parse_uniform_declaration)
        .any(|declaration| declaration.ty == "sampler2D")
}
