#[derive(Debug, Clone)]
pub struct DownloadPlan {
    pub title: String,
    pub stream_url: String,
    pub suggested_filename: String,
}
