pub(super) fn init_metrics() {
    describe_toplevel();
    describe_process();
    describe_middleware();
}

fn describe_toplevel() {
    metrics::describe_counter!(FILES, "How many files have been uploaded to vid-rs");
    metrics::describe_histogram!(
        CONVERT_DURATION,
        "Timings for converting media to a requested container format"
    );
    metrics::describe_histogram!(
        TRIM_DURATION,
        "Timings for trimming media to a requested range"
    );
}

pub(crate) const FILES: &str = "vid-rs.files";
pub(crate) const CONVERT_DURATION: &str = "vid-rs.convert.duration";
pub(crate) const TRIM_DURATION: &str = "vid-rs.trim.duration";

fn describe_process() {
    metrics::describe_counter!(
        PROCESS_START,
        "How many times vid-rs has spawned a media process"
    );
    metrics::describe_histogram!(
        PROCESS_DURATION,
        "Timings for how long spawned media processes take to complete"
    );
    metrics::describe_counter!(PROCESS_END, "How many spawned media processes have completed");
}

pub(crate) const PROCESS_START: &str = "vid-rs.process.start";
pub(crate) const PROCESS_DURATION: &str = "vid-rs.process.duration";
pub(crate) const PROCESS_END: &str = "vid-rs.process.end";

fn describe_middleware() {
    metrics::describe_counter!(
        REQUEST_START,
        "How many requests have been made to vid-rs, by requested path"
    );
    metrics::describe_counter!(
        REQUEST_END,
        "How many requests vid-rs has finished serving, by requested path"
    );
    metrics::describe_histogram!(
        REQUEST_TIMINGS,
        "How long vid-rs takes to serve requests, by requested path"
    );
}

pub(crate) const REQUEST_START: &str = "vid-rs.request.start";
pub(crate) const REQUEST_END: &str = "vid-rs.request.end";
pub(crate) const REQUEST_TIMINGS: &str = "vid-rs.request.timings";
