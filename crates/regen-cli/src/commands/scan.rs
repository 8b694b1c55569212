use anyhow::Result;
use regen_application::ScanOrchestrator;
use regen_inference::ImageRef;
use std::path::Path;

use crate::context::RuntimeContext;

pub async fn run(ctx: &RuntimeContext, image: &Path) -> Result<()> {
    let orchestrator = ScanOrchestrator::new(ctx.client.clone(), ctx.store.clone());
    let record = orchestrator.scan(&ImageRef::path(image)).await?;

    println!("{}", record.item_name);
    println!("  Disposal:   {}", record.disposal_method);
    println!("  Alternative: {}", record.alternative);
    println!("  Upcycle:    {}", record.upcycling_idea);
    println!("  Eco-tip:    {}", record.eco_tip);
    println!("  Points:     +{}", record.eco_points);

    let snapshot = ctx.store.snapshot().await;
    println!("Total eco-points: {}", snapshot.points);
    Ok(())
}
