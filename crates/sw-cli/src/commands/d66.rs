use sw_mechanics::roll_d66;

pub fn run(count: u32, seed: Option<u64>) -> Result<(), String> {
    if count == 0 {
        return Err("count must be at least 1".into());
    }
    let mut rng = super::rng(seed);
    let rolls: Vec<String> = (0..count)
        .map(|_| roll_d66(rng.as_mut()).to_string())
        .collect();
    println!("  d66: {}", rolls.join(" "));
    Ok(())
}
