#![no_main]

use querygraph_core::{parse_batch, GraphView};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(batch) = parse_batch(json) else {
        return;
    };

    let mut view = GraphView::default();
    view.load_records(&batch.records);

    let ids: Vec<String> = view.model().nodes.iter().map(|n| n.id.clone()).collect();
    for id in ids.iter().take(8) {
        view.click(id);
        let _ = view.frame();
    }
});
