#[cfg(test)]
pub mod mock {
    use std::cell::{Cell, RefCell};
    use std::collections::{HashMap, HashSet};
    use std::io::Write;

    use crate::host::{HostError, HostInterface, CLEAR_SEQUENCE};

    /// An in-memory mock implementation of `HostInterface` for testing.
    #[derive(Default)]
    pub struct MockHost {
        files: RefCell<HashMap<String, Vec<u8>>>,
        read_only: HashSet<String>,
        clears: Cell<usize>,
    }

    impl MockHost {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make writes to `path` fail with `PermissionDenied`.
        pub fn with_read_only(mut self, path: &str) -> Self {
            self.read_only.insert(path.to_string());
            self
        }

        pub fn file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.borrow().get(path).cloned()
        }

        pub fn file_string(&self, path: &str) -> Option<String> {
            self.file(path)
                .map(|data| String::from_utf8_lossy(&data).into_owned())
        }

        pub fn clear_count(&self) -> usize {
            self.clears.get()
        }
    }

    impl HostInterface for MockHost {
        fn write_file(&self, path: &str, data: &[u8]) -> Result<(), HostError> {
            if self.read_only.contains(path) {
                return Err(HostError::PermissionDenied(path.to_string()));
            }
            self.files
                .borrow_mut()
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn clear_screen(&self, out: &mut dyn Write) -> Result<(), HostError> {
            self.clears.set(self.clears.get() + 1);
            out.write_all(CLEAR_SEQUENCE.as_bytes())
                .map_err(|e| HostError::IoError(e.to_string()))
        }
    }
}

/// The farm command tree used throughout the tests.
#[cfg(test)]
pub mod fixtures {
    use std::io::Write;

    use cmdtree_shell::value::ArgType;

    use crate::command::{CommandSpec, Invocation};
    use crate::flag::FlagSpec;

    pub fn noop(_: &mut Invocation<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn inventory(inv: &mut Invocation<'_>) -> anyhow::Result<()> {
        let mut animals = vec!["cow", "horse", "chicken"];
        if inv.args.get_bool("sort") {
            animals.sort_unstable();
        }
        for animal in animals {
            writeln!(inv.stdout, "{animal}")?;
        }
        Ok(())
    }

    fn add(inv: &mut Invocation<'_>) -> anyhow::Result<()> {
        let kind = inv.args.get_str("type").unwrap_or_default();
        if inv.args.get_bool("verbose") {
            writeln!(inv.stdout, "adding a {kind} to the farm")?;
        }
        writeln!(inv.stdout, "added {kind}")?;
        Ok(())
    }

    fn create_snapshot(inv: &mut Invocation<'_>) -> anyhow::Result<()> {
        let sparse = inv.args.get_bool("sparse");
        writeln!(inv.stdout, "snapshot foo-1 sparse={sparse}")?;
        writeln!(inv.stdout, "snapshot bar-2 sparse={sparse}")?;
        Ok(())
    }

    pub fn farm_spec() -> CommandSpec {
        CommandSpec::new("farm")
            .description("interact with the farm")
            .flag(
                FlagSpec::new("verbose")
                    .short("v")
                    .description("explain what is happening"),
            )
            .subcommand(
                CommandSpec::new("inventory")
                    .description("obtain animal inventory")
                    .flag(
                        FlagSpec::new("sort")
                            .short("s")
                            .description("sort the inventory"),
                    )
                    .on_execute(inventory),
            )
            .subcommand(
                CommandSpec::new("add")
                    .description("add an animal to the farm")
                    .flag(
                        FlagSpec::new("type")
                            .short("t")
                            .description("kind of animal")
                            .arg_type(ArgType::String)
                            .one_of(["mammal", "bird", "reptile"])
                            .required(),
                    )
                    .on_execute(add),
            )
            .subcommand(
                CommandSpec::new("snapshot")
                    .description("manage farm snapshots")
                    .subcommand(
                        CommandSpec::new("create")
                            .description("capture the current farm")
                            .flag(FlagSpec::new("sparse").short("s"))
                            .on_execute(create_snapshot),
                    ),
            )
    }
}
