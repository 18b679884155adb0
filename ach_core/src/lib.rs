pub mod config;
pub mod display;
pub mod index;
pub mod install;
pub mod query;
pub mod selector;

use std::io::{stdin, stdout, Write};

/* FUNCTIONS */
/// Prints {prompt} and reads one line. None means stdin is closed.
pub fn read_input(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = stdout().flush();

    let mut input = String::new();
    return match stdin().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    };
}

/// Single-shot Y/n gate, defaulting to yes. Anything other than
/// empty, "y" or "yes" aborts.
pub fn get_user_permission(assume_yes: bool, msg: &str) -> bool {
    if assume_yes {
        println!("{msg} [Y/n]: y");
        return true;
    }

    let input = match read_input(&format!("{msg} [Y/n]: ")) {
        Some(input) => input.to_lowercase(),
        None => {
            println!();
            return false;
        }
    };
    return ["", "y", "yes"].contains(&input.as_str());
}
