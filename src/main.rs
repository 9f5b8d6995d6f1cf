fn main() {
    std::process::exit(carbonpaper::app::startup::startup());
}
