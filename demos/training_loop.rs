//! Early stopping in a simulated training loop.
//!
//! Feeds a plateauing validation-loss curve into an [`EarlyStopping`] policy
//! and "saves a checkpoint" (here: a print) whenever a new best is recorded.
//!
//! Run with: `cargo run --example training_loop`

use std::cell::Cell;
use std::rc::Rc;

use early_stopping::EarlyStopping;

fn main() -> early_stopping::Result<()> {
    // Loss improves quickly, then flattens out around epoch 6.
    let val_losses = [
        0.92, 0.71, 0.55, 0.44, 0.39, 0.36, 0.358, 0.361, 0.357, 0.360, 0.359, 0.362,
    ];

    let checkpoints = Rc::new(Cell::new(0_u32));
    let saved = Rc::clone(&checkpoints);

    let mut policy = EarlyStopping::builder()
        .patience(3)
        .delta(0.005)
        .verbose(true)
        .on_improvement(move || {
            saved.set(saved.get() + 1);
            println!("  -> new best, checkpoint saved");
        })
        .build()?;

    for (epoch, &loss) in val_losses.iter().enumerate() {
        println!("epoch {epoch}: val_loss = {loss:.3}");
        if policy.evaluate(loss) {
            println!("stopping early at epoch {epoch}");
            break;
        }
    }

    println!(
        "best val_loss = {:.3}, checkpoints saved = {}",
        policy.best_value().unwrap_or(f64::NAN),
        checkpoints.get(),
    );

    Ok(())
}
