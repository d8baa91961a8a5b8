pub mod config_reader;
