#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<String>, String)| {
    let mut tree = waymark::Tree::new();

    for route in data.0 {
        let _ = tree.insert(&route, ());
    }

    let _ = tree.at(&data.1);
    let _ = tree.find(&data.1);
    let _ = tree.find_by_prefix(&data.1);
});
