use crate::executor::ExecutionResult;
use crate::runtime::Runtime;
use anyhow::Result;
use nu_ansi_term::Color;

struct BuiltinHelp {
    usage: &'static str,
    brief: &'static str,
}

const BUILTINS: &[BuiltinHelp] = &[
    BuiltinHelp {
        usage: "cd <dir>",
        brief: "Change the working directory",
    },
    BuiltinHelp {
        usage: "jobs",
        brief: "List background jobs as [pid N] command",
    },
    BuiltinHelp {
        usage: "help",
        brief: "Show this text",
    },
    BuiltinHelp {
        usage: "exit, quit",
        brief: "Leave flush (background jobs keep running)",
    },
];

const SYNTAX: &[(&str, &str)] = &[
    ("cmd < file", "read standard input from file"),
    ("cmd > file", "write standard output to file (created or truncated)"),
    ("a | b", "feed the output of a into b (two commands at most)"),
    ("cmd &", "run in the background; must be the last word"),
];

/// Static usage text. Arguments are ignored.
pub fn builtin_help(_args: &[String], _runtime: &mut Runtime) -> Result<ExecutionResult> {
    Ok(ExecutionResult::success(render()))
}

fn render() -> String {
    let title_style = Color::Cyan.bold();
    let mut output = String::new();

    output.push_str(&title_style.paint("flush builtins").to_string());
    output.push('\n');
    let width = BUILTINS.iter().map(|b| b.usage.len()).max().unwrap_or(0);
    for builtin in BUILTINS {
        output.push_str(&format!(
            "  {:width$}  {}\n",
            builtin.usage,
            builtin.brief,
            width = width
        ));
    }

    output.push('\n');
    output.push_str(&title_style.paint("Syntax").to_string());
    output.push('\n');
    let width = SYNTAX.iter().map(|(form, _)| form.len()).max().unwrap_or(0);
    for (form, meaning) in SYNTAX {
        output.push_str(&format!("  {:width$}  {}\n", form, meaning, width = width));
    }
    output.push_str("\nMarkers only count as separate words: `a>b` is a plain argument.\n");

    output
}
