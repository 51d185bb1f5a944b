//! Example that demonstrates the usage shown in the package documentation.
//!
//! This shows how to parse, extend and emit CPU lists.

use cpu_set::CpuSet;

fn main() {
    println!("=== cpu_set README Example ===");

    let selected_processors = cpu_set::parse("0,2,4-6").unwrap();
    assert_eq!(
        selected_processors.iter().collect::<Vec<_>>(),
        vec![0, 2, 4, 5, 6]
    );

    println!("Selected processors: {selected_processors:?}");
    println!("As CPU list: {}", cpu_set::emit(&selected_processors));
    println!("As ranges: {}", cpu_set::emit_ranges(&selected_processors));

    let mut affinity = CpuSet::new();

    for setting in ["0-3", "8", "", "1,2"] {
        cpu_set::extend(&mut affinity, setting).unwrap();
        println!("After extending with {setting:?}: {affinity}");
    }

    match cpu_set::current_thread_affinity() {
        Ok((current, cpu_count)) => {
            println!("Current thread may run on: {current} (mask sized for {cpu_count} CPUs)");
        }
        Err(e) => println!("Current thread affinity is not available: {e}"),
    }

    println!("README example completed successfully!");
}
