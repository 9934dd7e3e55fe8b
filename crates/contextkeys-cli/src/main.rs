// ctxkeys CLI entry point

use contextkeys_cli::{output, router::CommandRouter};

fn main() {
    match CommandRouter::route() {
        Ok(out) => {
            if !out.is_empty() {
                println!("{}", out);
            }
        }
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}
