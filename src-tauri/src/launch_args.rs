use std::path::PathBuf;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct LaunchArgs {
    pub(crate) dev: bool,
    pub(crate) remote_debug: bool,
    pub(crate) disable_gpu: bool,
    pub(crate) config_path: Option<PathBuf>,
}

impl LaunchArgs {
    pub(crate) fn from_env() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    /// Unknown arguments are ignored; the web engine and the OS may pass their own.
    pub(crate) fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dev" => parsed.dev = true,
                "--remote-debug" => parsed.remote_debug = true,
                "--disable-gpu" => parsed.disable_gpu = true,
                "--config" => {
                    parsed.config_path = args
                        .next()
                        .map(|value| value.trim().to_string())
                        .filter(|value| !value.is_empty())
                        .map(PathBuf::from);
                }
                other => {
                    if let Some(value) = other.strip_prefix("--config=") {
                        let value = value.trim();
                        if !value.is_empty() {
                            parsed.config_path = Some(PathBuf::from(value));
                        }
                    }
                }
            }
        }

        parsed
    }
}
