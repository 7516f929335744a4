use colored::Colorize;
use launchpad_sdk::{
    num::Converter,
    source::ChainSource,
    sync::Synchronizer,
    types::SaleIndex,
};

pub(crate) async fn render<S: ChainSource>(
    sync: &Synchronizer<S>,
    index: SaleIndex,
) -> anyhow::Result<()> {
    let event = sync.sync().await;
    let snapshot = sync.snapshot();
    let Some(factory) = snapshot.factory() else {
        return Err(anyhow::anyhow!("factory unavailable: {}", event));
    };

    let reader = factory.reader(sync.source());
    let total = reader.total_tokens().await?;
    let sale = reader.token_sale(index, total).await?;

    println!("\n{}\n", format!("**** Sale #{} of {}", index, total).bright_blue());
    println!("  Name:    {}", sale.name.bold());
    println!("  Token:   {}", sale.token);
    println!("  Creator: {}", sale.creator);
    println!("  Sold:    {}", sale.sold);
    println!("  Raised:  {} ETH", Converter::ETHER.display(sale.raised));
    println!(
        "  Status:  {}",
        if sale.is_open { "open".green() } else { "closed".red() }
    );
    println!();

    Ok(())
}
