use ro_search::{angle_choice, contrast_choice_double, linspace, write_json};
use ro_models::{simple_sample, LipidMonolayer};
use ro_types::AnglePoint;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Which single angle pins down a simple two-layer sample best?
    let mut sample = simple_sample();
    let angles = linspace(0.3, 2.3, 50);
    let scan = angle_choice(&mut sample, &Vec::new(), &angles, 70, 20.0, &[])?;
    if let Some(best) = scan.best() {
        println!(
            "best single angle: {:.3} deg (min eigenvalue {:.4e})",
            best.value, best.min_eigenvalue
        );
    }
    println!("{}", serde_json::to_string_pretty(&scan.meta)?);
    write_json(&scan, "angle_scan.json")?;

    // Which pair of solvent contrasts should a monolayer be measured in?
    let mut monolayer = LipidMonolayer::new(true);
    let contrasts = linspace(-0.56, 6.35, 20);
    let plan = vec![AnglePoint::new(0.8, 70, 20.0)];
    let pairs = contrast_choice_double(&mut monolayer, &contrasts, &plan)?;
    if let Some(best) = pairs.best() {
        println!(
            "best contrast pair: ({:.2}, {:.2}) (min eigenvalue {:.4e})",
            best.x, best.y, best.min_eigenvalue
        );
    }

    Ok(())
}
