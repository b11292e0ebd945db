//! Line-based parser for the OMNeT++ scalar file format.

use super::{OmnetError, RunResults, Scalar, Statistic};

/// Split a line into whitespace separated tokens. Double-quoted tokens may contain whitespace and
/// backslash escapes (`\"`, `\\`, `\n`, `\t`).
pub fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut token = String::new();
        if c == '"' {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some('n') => token.push('\n'),
                        Some('t') => token.push('\t'),
                        Some(escaped) => token.push(escaped),
                        None => return Err("dangling escape at the end of the line".to_string()),
                    },
                    c => token.push(c),
                }
            }
            if !closed {
                return Err("unterminated quoted string".to_string());
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }

    Ok(tokens)
}

/// Parse the content of a scalar file into the runs it contains, in file order.
pub fn parse_runs(content: &str) -> Result<Vec<RunResults>, OmnetError> {
    let mut runs: Vec<RunResults> = Vec::new();
    // `field`, `bin` and `attr` lines following a `statistic` line belong to that statistic
    let mut in_statistic = false;

    for (idx, raw_line) in content.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let tokens = tokenize(trimmed).map_err(|msg| OmnetError::Parse { line, msg })?;

        match tokens[0].as_str() {
            "version" => {}
            "run" => {
                let [run_id] = args(&tokens, line)?;
                runs.push(RunResults {
                    run_id: run_id.to_string(),
                    ..Default::default()
                });
                in_statistic = false;
            }
            "attr" => {
                let [key, value] = args(&tokens, line)?;
                if in_statistic {
                    last_statistic(&mut runs, line)?
                        .attributes
                        .insert(key.to_string(), value.to_string());
                } else {
                    current_run(&mut runs, line)?
                        .attributes
                        .insert(key.to_string(), value.to_string());
                }
            }
            "itervar" | "config" => {
                let [key, value] = args(&tokens, line)?;
                current_run(&mut runs, line)?
                    .attributes
                    .insert(key.to_string(), value.to_string());
                in_statistic = false;
            }
            "param" => {
                let [pattern, value] = args(&tokens, line)?;
                current_run(&mut runs, line)?
                    .params
                    .push((pattern.to_string(), value.to_string()));
                in_statistic = false;
            }
            "scalar" => {
                let [module, name, value] = args(&tokens, line)?;
                let value = parse_value(value, line)?;
                current_run(&mut runs, line)?.scalars.push(Scalar {
                    module: module.to_string(),
                    name: name.to_string(),
                    value,
                });
                in_statistic = false;
            }
            "statistic" => {
                let [module, name] = args(&tokens, line)?;
                current_run(&mut runs, line)?.statistics.push(Statistic {
                    module: module.to_string(),
                    name: name.to_string(),
                    ..Default::default()
                });
                in_statistic = true;
            }
            "field" => {
                let [name, value] = args(&tokens, line)?;
                let value = parse_value(value, line)?;
                if !in_statistic {
                    return Err(parse_error(line, "`field` outside of a statistic"));
                }
                last_statistic(&mut runs, line)?
                    .fields
                    .insert(name.to_string(), value);
            }
            "bin" => {
                let [lower, count] = args(&tokens, line)?;
                let bin = (parse_value(lower, line)?, parse_value(count, line)?);
                if !in_statistic {
                    return Err(parse_error(line, "`bin` outside of a statistic"));
                }
                last_statistic(&mut runs, line)?.bins.push(bin);
            }
            keyword => {
                log::trace!("Skipping line {line} with unknown keyword `{keyword}`");
            }
        }
    }

    Ok(runs)
}

fn parse_error(line: usize, msg: impl Into<String>) -> OmnetError {
    OmnetError::Parse {
        line,
        msg: msg.into(),
    }
}

/// Take the first `N` arguments following the keyword.
fn args<const N: usize>(tokens: &[String], line: usize) -> Result<[&str; N], OmnetError> {
    if tokens.len() <= N {
        return Err(parse_error(
            line,
            format!(
                "`{}` expects {N} arguments, got {}",
                tokens[0],
                tokens.len() - 1
            ),
        ));
    }
    Ok(std::array::from_fn(|i| tokens[i + 1].as_str()))
}

fn parse_value(value: &str, line: usize) -> Result<f64, OmnetError> {
    value
        .parse()
        .map_err(|_| parse_error(line, format!("invalid number `{value}`")))
}

fn current_run(runs: &mut [RunResults], line: usize) -> Result<&mut RunResults, OmnetError> {
    runs.last_mut()
        .ok_or_else(|| parse_error(line, "result record before the first `run` line"))
}

fn last_statistic(runs: &mut [RunResults], line: usize) -> Result<&mut Statistic, OmnetError> {
    current_run(runs, line)?
        .statistics
        .last_mut()
        .ok_or_else(|| parse_error(line, "statistic record without a `statistic` line"))
}
