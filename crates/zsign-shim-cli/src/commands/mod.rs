pub mod config;
pub mod platform;
pub mod sign;

/// Writes relayed zsign output to stdout, ending with a newline.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    if output.ends_with('\n') {
        print!("{}", output);
    } else {
        println!("{}", output);
    }
}
