//! See [`debateland::test::statistics_workload`] for documentation.

#![no_main]

use debateland::test::statistics_workload::Workload;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: Workload| {
    data.run();
});
