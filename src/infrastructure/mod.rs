pub mod in_memory;
pub mod results_log;
pub mod ronin;
