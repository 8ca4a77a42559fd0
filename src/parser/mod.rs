pub mod ast;

use crate::error::ShellError;
use crate::lexer::{Lexer, Token};
use ast::*;

/// Which redirections a stage is allowed to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Only,
    First,
    Second,
}

impl Stage {
    fn allows_input(self) -> bool {
        self != Stage::Second
    }

    fn allows_output(self) -> bool {
        self != Stage::First
    }
}

pub struct Parser {
    tokens: Vec<Token>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Tokenize and build a line in one step.
    ///
    /// Returns `Ok(None)` for blank lines.
    pub fn parse_line(line: &str) -> Result<Option<PipelineSpec>, ShellError> {
        let tokens = Lexer::tokenize(line);
        Parser::new(tokens).parse()
    }

    pub fn parse(self) -> Result<Option<PipelineSpec>, ShellError> {
        let mut tokens = self.tokens;

        let background = tokens.last() == Some(&Token::Background);
        if background {
            tokens.pop();
        }
        if tokens.is_empty() {
            return Ok(None);
        }

        let pipes: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Token::PipeSeparator)
            .map(|(i, _)| i)
            .collect();

        match pipes.as_slice() {
            [] => {
                let mut command = build_stage(tokens, Stage::Only)?;
                command.background = background;
                Ok(Some(PipelineSpec::Single(command)))
            }
            [at] => {
                let mut rest = tokens.split_off(*at);
                rest.remove(0);
                if tokens.is_empty() || rest.is_empty() {
                    return Err(ShellError::malformed_pipeline("missing command next to '|'"));
                }
                let first = build_stage(tokens, Stage::First)?;
                let mut second = build_stage(rest, Stage::Second)?;
                second.background = background;
                Ok(Some(PipelineSpec::Pair { first, second }))
            }
            _ => Err(ShellError::malformed_pipeline(
                "only two-stage pipelines are supported",
            )),
        }
    }
}

fn build_stage(tokens: Vec<Token>, stage: Stage) -> Result<CommandSpec, ShellError> {
    let mut args = Vec::with_capacity(tokens.len());
    let mut input_path = None;
    let mut output_path = None;

    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        match token {
            Token::Word(word) => args.push(word),
            Token::RedirectIn | Token::RedirectOut => {
                let is_input = token == Token::RedirectIn;
                let operator = if is_input { '<' } else { '>' };

                let path = match iter.next() {
                    Some(Token::Word(path)) => path,
                    Some(_) => {
                        return Err(ShellError::malformed_redirection(format!(
                            "expected a file name after '{}'",
                            operator
                        )))
                    }
                    None => {
                        return Err(ShellError::malformed_redirection(format!(
                            "missing file name after '{}'",
                            operator
                        )))
                    }
                };

                let (slot, allowed) = if is_input {
                    (&mut input_path, stage.allows_input())
                } else {
                    (&mut output_path, stage.allows_output())
                };
                if !allowed {
                    return Err(ShellError::malformed_redirection(format!(
                        "'{}' is not allowed on the {} side of a pipe",
                        operator,
                        if is_input { "right" } else { "left" }
                    )));
                }
                if slot.is_some() {
                    return Err(ShellError::malformed_redirection(format!(
                        "'{}' given more than once",
                        operator
                    )));
                }
                *slot = Some(path);
            }
            // Both are removed by `Parser::parse` before stages are built.
            Token::PipeSeparator | Token::Background => {
                return Err(ShellError::malformed_pipeline("unexpected marker"));
            }
        }
    }

    if args.is_empty() {
        return Err(ShellError::malformed_redirection("redirection without a command"));
    }

    let mut command = CommandSpec::new(args);
    command.input_path = input_path;
    command.output_path = output_path;
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Option<PipelineSpec>, ShellError> {
        Parser::parse_line(line)
    }

    fn single(line: &str) -> CommandSpec {
        match parse(line).unwrap() {
            Some(PipelineSpec::Single(command)) => command,
            other => panic!("expected a single command, got {:?}", other),
        }
    }

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_plain_words_become_argv() {
        let command = single("ls -la /tmp\n");
        assert_eq!(command.program, "ls");
        assert_eq!(command.args, strings(&["ls", "-la", "/tmp"]));
        assert_eq!(command.operands(), &strings(&["-la", "/tmp"])[..]);
        assert!(!command.background);
        assert_eq!(command.input_path, None);
        assert_eq!(command.output_path, None);
    }

    #[test]
    fn test_blank_lines() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   \t\n").unwrap(), None);
        assert_eq!(parse("&").unwrap(), None);
    }

    #[test]
    fn test_input_redirection() {
        let command = single("a < in.txt");
        assert_eq!(command.input_path.as_deref(), Some("in.txt"));
        assert_eq!(command.args, strings(&["a"]));
    }

    #[test]
    fn test_output_redirection() {
        let command = single("a > out.txt");
        assert_eq!(command.output_path.as_deref(), Some("out.txt"));
        assert_eq!(command.args, strings(&["a"]));
    }

    #[test]
    fn test_both_redirections_in_any_position() {
        let command = single("sort > out.txt -r < in.txt");
        assert_eq!(command.args, strings(&["sort", "-r"]));
        assert_eq!(command.input_path.as_deref(), Some("in.txt"));
        assert_eq!(command.output_path.as_deref(), Some("out.txt"));
    }

    #[test]
    fn test_background_flag() {
        let command = single("sleep 10 &\n");
        assert!(command.background);
        assert_eq!(command.args, strings(&["sleep", "10"]));

        let command = single("sleep 10 & \n");
        assert!(command.background);
        assert!(!command.args.contains(&"&".to_string()));
    }

    #[test]
    fn test_unattached_redirection_is_a_word() {
        let command = single("echo a>b");
        assert_eq!(command.args, strings(&["echo", "a>b"]));
        assert_eq!(command.output_path, None);
    }

    #[test]
    fn test_missing_redirection_target() {
        let err = parse("cat <").unwrap_err();
        assert!(matches!(err, ShellError::MalformedRedirection { .. }));

        let err = parse("echo hi >\n").unwrap_err();
        assert!(matches!(err, ShellError::MalformedRedirection { .. }));

        let err = parse("echo hi > &").unwrap_err();
        assert!(matches!(err, ShellError::MalformedRedirection { .. }));

        let err = parse("cat < > out").unwrap_err();
        assert!(matches!(err, ShellError::MalformedRedirection { .. }));
    }

    #[test]
    fn test_duplicate_operator_is_rejected() {
        let err = parse("cat < a < b").unwrap_err();
        assert!(err.to_string().contains("more than once"));

        let err = parse("echo > a > b").unwrap_err();
        assert!(matches!(err, ShellError::MalformedRedirection { .. }));
    }

    #[test]
    fn test_redirection_without_command() {
        let err = parse("< in.txt").unwrap_err();
        assert!(matches!(err, ShellError::MalformedRedirection { .. }));
    }

    #[test]
    fn test_two_stage_pipeline() {
        let spec = parse("cat < in.txt | sort -r > out.txt").unwrap().unwrap();
        let PipelineSpec::Pair { first, second } = spec else {
            panic!("expected a pipeline");
        };
        assert_eq!(first.args, strings(&["cat"]));
        assert_eq!(first.input_path.as_deref(), Some("in.txt"));
        assert_eq!(first.output_path, None);
        assert_eq!(second.args, strings(&["sort", "-r"]));
        assert_eq!(second.output_path.as_deref(), Some("out.txt"));
        assert_eq!(second.input_path, None);
    }

    #[test]
    fn test_pipeline_background_marker_lands_on_second_stage() {
        let spec = parse("yes | head -1 &").unwrap().unwrap();
        assert!(spec.is_background());
        assert!(spec.is_pipeline());
        assert_eq!(spec.head().program, "yes");
    }

    #[test]
    fn test_pipeline_redirection_sides() {
        let err = parse("a > x | b").unwrap_err();
        assert!(matches!(err, ShellError::MalformedRedirection { .. }));

        let err = parse("a | b < x").unwrap_err();
        assert!(matches!(err, ShellError::MalformedRedirection { .. }));
    }

    #[test]
    fn test_malformed_pipelines() {
        for line in ["| b", "a |", "|", "a | b | c"] {
            let err = parse(line).unwrap_err();
            assert!(
                matches!(err, ShellError::MalformedPipeline { .. }),
                "{} gave {:?}",
                line,
                err
            );
        }
    }

    #[test]
    fn test_long_lines_are_not_truncated() {
        let words: Vec<String> = (0..10_000).map(|i| format!("w{}", i)).collect();
        let line = format!("echo {}", words.join(" "));
        let command = single(&line);
        assert_eq!(command.args.len(), 10_001);
        assert_eq!(command.args.last().map(String::as_str), Some("w9999"));
    }
}
