/// One normalized command: what to run and where its standard streams go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandSpec {
    pub program: String,
    /// Argument vector handed to the program; `args[0] == program`.
    pub args: Vec<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub background: bool,
}

impl CommandSpec {
    pub fn new(args: Vec<String>) -> Self {
        Self {
            program: args.first().cloned().unwrap_or_default(),
            args,
            ..Self::default()
        }
    }

    /// Arguments after the program name.
    pub fn operands(&self) -> &[String] {
        self.args.get(1..).unwrap_or(&[])
    }
}

/// Everything one input line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineSpec {
    Single(CommandSpec),
    /// `first`'s stdout feeds `second`'s stdin. Only `first` may read from a
    /// file and only `second` may write to one.
    Pair {
        first: CommandSpec,
        second: CommandSpec,
    },
}

impl PipelineSpec {
    /// The command whose name decides built-in dispatch.
    pub fn head(&self) -> &CommandSpec {
        match self {
            PipelineSpec::Single(command) => command,
            PipelineSpec::Pair { first, .. } => first,
        }
    }

    pub fn is_background(&self) -> bool {
        match self {
            PipelineSpec::Single(command) => command.background,
            PipelineSpec::Pair { second, .. } => second.background,
        }
    }

    pub fn is_pipeline(&self) -> bool {
        matches!(self, PipelineSpec::Pair { .. })
    }
}
