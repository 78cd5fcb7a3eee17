#![forbid(unsafe_code)]

fn main() {
    std::process::exit(hw_projects_cli::run());
}
