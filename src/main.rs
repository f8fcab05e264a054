use streambench::error::AppResult;

fn main() -> AppResult<()> {
    streambench::entry::run()
}
