pub mod probe_commands;
