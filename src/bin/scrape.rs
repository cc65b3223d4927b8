use offer_scout::{init_logger, listing::Prompt, Bot};

#[tokio::main]
async fn main() -> offer_scout::Result<()> {
    init_logger(log::LevelFilter::Debug);
    let mut bot = Bot::new();
    bot.load_config()?;
    bot.init().await?;
    let saved = match bot.scrape(&mut Prompt::stdio()).await {
        Ok(true) => bot.save(),
        Ok(false) => Ok(()),
        Err(e) => Err(e),
    };
    bot.quit().await?;
    saved
}
