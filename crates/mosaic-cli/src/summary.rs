use console::Style;
use mosaic_core::config::StitchConfig;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_stitch_summary(dir: &std::path::Path, yaml: &std::path::Path, cfg: &StitchConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Mosaic Stitch"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Positions"),
        s.path.apply_to(yaml.display())
    );
    println!();

    println!("  {}", s.header.apply_to("Alignment"));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Overlap"),
        s.value.apply_to(format!("{} px", cfg.align.overlap))
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Max shift Z"),
        s.value.apply_to(cfg.align.max_shift_z)
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Max shift X"),
        s.value.apply_to(cfg.align.max_shift_x)
    );
    println!();

    println!("  {}", s.header.apply_to("Optimizer"));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Islands"),
        s.value.apply_to(cfg.optimizer.islands)
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Temperature"),
        s.value.apply_to(format!("{} -> {}", cfg.optimizer.ts, cfg.optimizer.tf))
    );
    println!();
}
