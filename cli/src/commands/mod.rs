mod probe;
mod run;

pub(crate) use probe::cmd_probe;
pub(crate) use run::cmd_run;
