//! Comma-continuation joining.
//!
//! An unquoted `[1, 2, 3]` reaches us as `[1,` `2,` `3]`. Before coercion we
//! glue such fragments back together:
//! 1. a token continues into its successor when it ends in `,`, when its last
//!    comma-separated segment is nothing but opening brackets (`[`, `x, {`),
//!    or when it ends in `:` inside an unclosed bracket (`{'a':`)
//! 2. a token starting with `,` is absorbed by its predecessor
//!
//! Both passes repeat until neither changes anything, so joining is idempotent.

const OPENERS: [char; 3] = ['[', '(', '{'];
const CLOSERS: [char; 3] = [']', ')', '}'];

/// Opening brackets minus closing ones. Quotes are not tracked.
fn open_depth(token: &str) -> isize {
    token.chars().fold(0, |depth, c| {
        if OPENERS.contains(&c) {
            depth + 1
        } else if CLOSERS.contains(&c) {
            depth - 1
        } else {
            depth
        }
    })
}

/// Whether a token continues into the next one.
fn continues(token: &str) -> bool {
    if token.ends_with(',') {
        return true;
    }
    if token.ends_with(':') && open_depth(token) > 0 {
        return true;
    }
    let tail = token.rsplit(',').next().unwrap_or(token).trim_start();
    !tail.is_empty() && tail.chars().all(|c| OPENERS.contains(&c))
}

/// Separator placed between a continuing token and its successor.
fn separator(token: &str) -> &'static str {
    if token.ends_with(',') || token.ends_with(':') {
        " "
    } else {
        ""
    }
}

/// Trailing continuations absorb their successor. Returns whether anything merged.
fn join_trailing(tokens: &mut Vec<String>) -> bool {
    let mut merged_any = false;
    let mut i = 0;
    while i + 1 < tokens.len() {
        if continues(&tokens[i]) {
            let next = tokens.remove(i + 1);
            let sep = separator(&tokens[i]);
            tokens[i].push_str(sep);
            tokens[i].push_str(&next);
            merged_any = true;
            tracing::trace!(token = %tokens[i], "joined trailing continuation");
        } else {
            i += 1;
        }
    }
    merged_any
}

/// Leading commas attach to their predecessor. Returns whether anything merged.
fn join_leading(tokens: &mut Vec<String>) -> bool {
    let mut merged_any = false;
    let mut i = 1;
    while i < tokens.len() {
        if tokens[i].starts_with(',') {
            let current = tokens.remove(i);
            tokens[i - 1].push_str(&current);
            merged_any = true;
            tracing::trace!(token = %tokens[i - 1], "joined leading comma");
            // An empty predecessor leaves the merged token starting with ','.
            i = (i - 1).max(1);
        } else {
            i += 1;
        }
    }
    merged_any
}

/// Repair shell-fragmented literals in place.
pub fn join_continuations(tokens: &mut Vec<String>) {
    loop {
        let trailing = join_trailing(tokens);
        let leading = join_leading(tokens);
        if !trailing && !leading {
            break;
        }
    }
}

/// Owned convenience wrapper around [`join_continuations`].
pub fn joined(mut tokens: Vec<String>) -> Vec<String> {
    join_continuations(&mut tokens);
    tokens
}
