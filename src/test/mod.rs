//! Test support. The workloads are also driven by the fuzzer in `fuzz/`.
