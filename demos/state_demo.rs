use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    rephrase::demo_apps::run_state_demo(std::env::args().skip(1))
}
