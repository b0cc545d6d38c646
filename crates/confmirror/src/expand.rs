//! Shell-style environment placeholder expansion.
//!
//! Replaces `${NAME}` and `$NAME` references with values from the process
//! environment. Unlike a shell (or Go's `os.ExpandEnv`, which erases unset
//! variables), references that cannot be resolved are left in the output
//! as literal text, so a second expansion of already-expanded output is a
//! no-op and partially-templated files survive round trips unharmed.
//!
//! Names follow the usual identifier rules: a letter or underscore
//! followed by letters, digits or underscores. Anything else after a `$`
//! (including `${` with no closing brace, `${}` and a trailing `$`) is not
//! a reference and passes through verbatim.

/// Expand `${NAME}` / `$NAME` references against the process environment.
///
/// Unresolved references are preserved as literal text.
#[must_use]
pub fn expand(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

/// Expand placeholder references using an injectable variable lookup.
///
/// This is the testable core of [`expand`]; production code resolves
/// against [`std::env::var`].
pub fn expand_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(idx) = rest.find('$') {
        out.push_str(&rest[..idx]);
        let reference = &rest[idx..];
        let after = &reference[1..];

        if let Some(braced) = after.strip_prefix('{') {
            let Some(end) = braced.find('}') else {
                // Unterminated `${`: nothing past here can be a reference.
                out.push_str(reference);
                return out;
            };

            let name = &braced[..end];
            match lookup_valid(name, &lookup) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&reference[..name.len() + 3]),
            }
            rest = &braced[end + 1..];
            continue;
        }

        let len = name_len(after);
        if len == 0 {
            out.push('$');
            rest = after;
            continue;
        }

        let name = &after[..len];
        match lookup(name) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&reference[..len + 1]),
        }
        rest = &after[len..];
    }

    out.push_str(rest);
    out
}

/// Look a braced name up, treating invalid identifiers as unresolvable.
fn lookup_valid<F>(name: &str, lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if name_len(name) == name.len() && !name.is_empty() {
        lookup(name)
    } else {
        None
    }
}

/// Length of the longest valid identifier prefix of `s`, in bytes.
fn name_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut len = 0;

    while len < bytes.len() {
        let b = bytes[len];
        let valid = if len == 0 {
            b.is_ascii_alphabetic() || b == b'_'
        } else {
            b.is_ascii_alphanumeric() || b == b'_'
        };

        if !valid {
            break;
        }
        len += 1;
    }

    len
}
