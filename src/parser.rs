use tracing::{debug, trace};

use crate::{ArgValue, Store};

/// Build a fresh [`Store`] from command-line tokens (program name excluded)
///
/// Every token up to the first one not starting with `-` becomes a
/// flag entry. That token and everything after it are kept verbatim as
/// trailing arguments.
pub fn parse<I, S>(args: I) -> Store
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut store = Store::new();
    let mut args_iter = args.into_iter().map(Into::into);

    while let Some(arg) = args_iter.next() {
        if !arg.starts_with('-') {
            debug!("Stopping flag parsing at non-flag argument: {}", arg);
            store.trailing.push(arg);
            store.trailing.extend(args_iter.by_ref());
            break;
        }

        let (name, value) = split_token(&arg);
        trace!("Parsed flag {} = {:?}", name, value);
        store.insert(name, value);
    }

    debug!(
        "Built flag store with {} entries, {} trailing arguments",
        store.len(),
        store.trailing.len()
    );

    store
}

/// Split `-name=value` / `--name=value` into its canonical `-name` key
/// and value. Caller guarantees the token starts with `-`.
pub(crate) fn split_token(token: &str) -> (String, ArgValue) {
    let rest = token.strip_prefix('-').unwrap_or(token);
    // -- is the same as -
    let rest = rest.strip_prefix('-').unwrap_or(rest);

    match rest.split_once('=') {
        Some((name, value)) => (format!("-{}", name), ArgValue::Given(value.to_string())),
        None => (format!("-{}", rest), ArgValue::Bare),
    }
}
