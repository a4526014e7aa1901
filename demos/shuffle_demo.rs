use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    rephrase::demo_apps::run_shuffle_demo(std::env::args().skip(1))
}
