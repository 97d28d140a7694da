//! Tokenizer for raw command-line override arguments

/// Collect `--name value` and `--name=value` pairs from raw arguments.
///
/// A `--name` followed by another `--option` (or by nothing) is a bare flag
/// and is skipped, as are positional arguments that follow a pair. Names are
/// returned without the leading dashes.
///
/// ```
/// use strata_core::parse_cli_args;
///
/// let pairs = parse_cli_args(["--verbose", "--ui--addr", "127.0.0.1", "--ui--port=80"]);
/// assert_eq!(pairs, vec![
///     ("ui--addr".to_string(), "127.0.0.1".to_string()),
///     ("ui--port".to_string(), "80".to_string()),
/// ]);
/// ```
pub fn parse_cli_args<I, S>(args: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
    let mut pairs = Vec::new();
    let mut index = 0;

    while index < args.len() {
        let Some(name) = args[index].strip_prefix("--").filter(|n| !n.is_empty()) else {
            index += 1;
            continue;
        };

        if let Some((name, value)) = name.split_once('=') {
            pairs.push((name.to_string(), value.to_string()));
            index += 1;
            continue;
        }

        match args.get(index + 1) {
            Some(value) if !value.starts_with("--") => {
                pairs.push((name.to_string(), value.clone()));
                index += 2;
            }
            _ => index += 1,
        }
    }

    pairs
}
