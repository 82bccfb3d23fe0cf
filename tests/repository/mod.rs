mod tests_code;
mod tests_multiplexer;
mod tests_qualifier;
mod tests_reset;
mod tests_resolution;
