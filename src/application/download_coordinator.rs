use std::path::PathBuf;

use futures::{stream::BoxStream, StreamExt};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::{
    api::{choose_audio_format, ResolverClient},
    domain::{progress, AppError, DownloadPlan},
    library::{MediaLibrary, APP_ALBUM},
    storage::StorageStrategy,
    utils::sanitize_filename,
};

/// Tag appended to every downloaded file's name.
const APP_TAG: &str = "[ViBE]";

#[derive(Debug, Clone)]
pub enum DownloadEvent {
    /// Integer percent in [0, 100].
    Progress(u8),
    Completed(PathBuf),
    Failed(AppError),
}

#[derive(Clone)]
pub struct DownloadCoordinator {
    client: ResolverClient,
    library: MediaLibrary,
    storage: StorageStrategy,
}

impl DownloadCoordinator {
    pub fn new(client: ResolverClient, library: MediaLibrary, storage: StorageStrategy) -> Self {
        Self {
            client,
            library,
            storage,
        }
    }

    /// Resolve the URL and pick the audio variant to fetch.
    pub async fn prepare_download(&self, video_url: String) -> Result<DownloadPlan, AppError> {
        let info = self
            .client
            .resolve(&video_url)
            .await
            .map_err(|e| AppError::Resolve(e.to_string()))?;

        let format =
            choose_audio_format(&info.formats).map_err(|e| AppError::Resolve(e.to_string()))?;

        let suggested_filename = format!("{}{}.mp3", sanitize_filename(&info.title), APP_TAG);

        Ok(DownloadPlan {
            title: info.title.clone(),
            stream_url: format.url.clone(),
            suggested_filename,
        })
    }

    pub fn storage(&self) -> StorageStrategy {
        self.storage
    }

    /// Obtain the destination directory per the configured storage
    /// strategy. `None` means the user declined to grant one; the caller
    /// must treat that as a silent no-op.
    pub async fn resolve_destination(&self) -> Option<PathBuf> {
        self.storage.resolve_destination().await
    }

    /// Run the transfer as a stream of events: progress updates, then a
    /// single `Completed` or `Failed`. An already-present partial file
    /// continues where it left off when the server honors range requests.
    pub fn download_stream(
        &self,
        plan: DownloadPlan,
        dest_dir: PathBuf,
    ) -> BoxStream<'static, DownloadEvent> {
        futures::stream::unfold(
            RuntimeState::Start {
                client: self.client.clone(),
                library: self.library.clone(),
                plan,
                dest_dir,
            },
            |state| async move {
                match state {
                    RuntimeState::Start {
                        client,
                        library,
                        plan,
                        dest_dir,
                    } => {
                        if let Err(e) = tokio::fs::create_dir_all(&dest_dir).await {
                            return Some((
                                DownloadEvent::Failed(AppError::Io(format!(
                                    "Failed to create directory: {}",
                                    e
                                ))),
                                RuntimeState::Finished,
                            ));
                        }

                        let path = dest_dir.join(&plan.suggested_filename);
                        let offset = match tokio::fs::metadata(&path).await {
                            Ok(meta) => meta.len(),
                            Err(_) => 0,
                        };

                        let (total, resumed_from, stream) =
                            match client.download_stream(&plan.stream_url, offset).await {
                                Ok(opened) => opened,
                                Err(e) => {
                                    return Some((
                                        DownloadEvent::Failed(AppError::Transfer(e.to_string())),
                                        RuntimeState::Finished,
                                    ));
                                }
                            };

                        let open = if resumed_from > 0 {
                            tokio::fs::OpenOptions::new()
                                .append(true)
                                .open(&path)
                                .await
                        } else {
                            tokio::fs::File::create(&path).await
                        };
                        let file = match open {
                            Ok(file) => file,
                            Err(e) => {
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(format!(
                                        "Failed to create file: {}",
                                        e
                                    ))),
                                    RuntimeState::Finished,
                                ));
                            }
                        };

                        Some((
                            DownloadEvent::Progress(progress::percent(resumed_from, total)),
                            RuntimeState::Downloading {
                                file,
                                stream: stream.boxed(),
                                written: resumed_from,
                                total,
                                path,
                                title: plan.title,
                                library,
                            },
                        ))
                    }
                    RuntimeState::Downloading {
                        mut file,
                        mut stream,
                        mut written,
                        total,
                        path,
                        title,
                        library,
                    } => match stream.next().await {
                        Some(Ok(chunk)) => {
                            if let Err(e) = file.write_all(&chunk).await {
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(format!(
                                        "Write error: {}",
                                        e
                                    ))),
                                    RuntimeState::Finished,
                                ));
                            }

                            written += chunk.len() as u64;

                            Some((
                                DownloadEvent::Progress(progress::percent(written, total)),
                                RuntimeState::Downloading {
                                    file,
                                    stream,
                                    written,
                                    total,
                                    path,
                                    title,
                                    library,
                                },
                            ))
                        }
                        Some(Err(e)) => Some((
                            DownloadEvent::Failed(AppError::Transfer(e.to_string())),
                            RuntimeState::Finished,
                        )),
                        None => {
                            if let Err(e) = file.sync_all().await {
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(format!(
                                        "Failed to sync file: {}",
                                        e
                                    ))),
                                    RuntimeState::Finished,
                                ));
                            }

                            // Media-index registration is non-fatal: the
                            // file is on disk either way.
                            if let Err(e) = library.register(APP_ALBUM, &title, &path) {
                                warn!(error = %e, "media index registration failed");
                            }

                            Some((DownloadEvent::Completed(path), RuntimeState::Finished))
                        }
                    },
                    RuntimeState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

enum RuntimeState {
    Start {
        client: ResolverClient,
        library: MediaLibrary,
        plan: DownloadPlan,
        dest_dir: PathBuf,
    },
    Downloading {
        file: tokio::fs::File,
        stream: BoxStream<'static, crate::api::Result<bytes::Bytes>>,
        written: u64,
        total: Option<u64>,
        path: PathBuf,
        title: String,
        library: MediaLibrary,
    },
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ResolverConfig;

    fn coordinator(base_url: String, library: MediaLibrary) -> DownloadCoordinator {
        DownloadCoordinator::new(
            ResolverClient::new(ResolverConfig { base_url }),
            library,
            StorageStrategy::FixedAppDirectory,
        )
    }

    fn plan(stream_url: String) -> DownloadPlan {
        DownloadPlan {
            title: "Some Song".to_string(),
            stream_url,
            suggested_filename: "Some Song[ViBE].mp3".to_string(),
        }
    }

    #[tokio::test]
    async fn test_prepare_builds_tagged_filename() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"title": "A/B Song", "formats": [{"quality": "highestaudio", "url": "s1"}]}"#,
            )
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(
            server.url(),
            MediaLibrary::new(dir.path().join("library.json")),
        );
        let plan = coordinator
            .prepare_download("https://example.com/watch?v=abc".to_string())
            .await
            .unwrap();

        assert_eq!(plan.stream_url, "s1");
        assert_eq!(plan.suggested_filename, "A_B Song[ViBE].mp3");
    }

    #[tokio::test]
    async fn test_prepare_propagates_missing_audio_format() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"title": "Video Only", "formats": [{"quality": "1080p", "url": "v"}]}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(
            server.url(),
            MediaLibrary::new(dir.path().join("library.json")),
        );
        let err = coordinator
            .prepare_download("https://example.com/watch?v=abc".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Resolve(_)));
    }

    #[tokio::test]
    async fn test_download_creates_missing_directory_and_completes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/audio.mp3")
            .with_status(200)
            .with_body("0123456789")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("does").join("not").join("exist");
        let coordinator = coordinator(
            server.url(),
            MediaLibrary::new(dir.path().join("library.json")),
        );

        let events: Vec<_> = coordinator
            .download_stream(plan(format!("{}/audio.mp3", server.url())), dest.clone())
            .collect()
            .await;

        assert!(matches!(events.first(), Some(DownloadEvent::Progress(0))));
        for event in &events {
            if let DownloadEvent::Progress(p) = event {
                assert!(*p <= 100);
            }
        }
        let path = match events.last().unwrap() {
            DownloadEvent::Completed(path) => path.clone(),
            other => panic!("expected Completed, got {:?}", other),
        };
        assert_eq!(path, dest.join("Some Song[ViBE].mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), b"0123456789");
    }

    #[tokio::test]
    async fn test_download_resumes_partial_file() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/audio.mp3")
            .match_header("range", "bytes=5-")
            .with_status(206)
            .with_body("56789")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().to_path_buf();
        std::fs::write(dest.join("Some Song[ViBE].mp3"), "01234").unwrap();

        let coordinator = coordinator(
            server.url(),
            MediaLibrary::new(dir.path().join("library.json")),
        );
        let events: Vec<_> = coordinator
            .download_stream(plan(format!("{}/audio.mp3", server.url())), dest.clone())
            .collect()
            .await;

        // 5 of 10 bytes already on disk
        assert!(matches!(events.first(), Some(DownloadEvent::Progress(50))));
        assert!(matches!(events.last(), Some(DownloadEvent::Completed(_))));
        assert_eq!(
            std::fs::read(dest.join("Some Song[ViBE].mp3")).unwrap(),
            b"0123456789"
        );
    }

    #[tokio::test]
    async fn test_redownload_of_complete_file_restarts() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/audio.mp3")
            .match_header("range", "bytes=10-")
            .with_status(416)
            .create_async()
            .await;
        server
            .mock("GET", "/audio.mp3")
            .match_header("range", mockito::Matcher::Missing)
            .with_status(200)
            .with_body("0123456789")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().to_path_buf();
        // A previous run already downloaded the whole file
        std::fs::write(dest.join("Some Song[ViBE].mp3"), "0123456789").unwrap();

        let coordinator = coordinator(
            server.url(),
            MediaLibrary::new(dir.path().join("library.json")),
        );
        let events: Vec<_> = coordinator
            .download_stream(plan(format!("{}/audio.mp3", server.url())), dest.clone())
            .collect()
            .await;

        assert!(matches!(events.first(), Some(DownloadEvent::Progress(0))));
        assert!(matches!(events.last(), Some(DownloadEvent::Completed(_))));
        assert_eq!(
            std::fs::read(dest.join("Some Song[ViBE].mp3")).unwrap(),
            b"0123456789"
        );
    }

    #[tokio::test]
    async fn test_failed_registration_still_completes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/audio.mp3")
            .with_status(200)
            .with_body("abc")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(
            server.url(),
            MediaLibrary::new(PathBuf::from("/proc/no/such/place/library.json")),
        );

        let events: Vec<_> = coordinator
            .download_stream(
                plan(format!("{}/audio.mp3", server.url())),
                dir.path().to_path_buf(),
            )
            .collect()
            .await;

        assert!(matches!(events.last(), Some(DownloadEvent::Completed(_))));
    }

    #[tokio::test]
    async fn test_transfer_error_surfaces() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/audio.mp3")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator(
            server.url(),
            MediaLibrary::new(dir.path().join("library.json")),
        );

        let events: Vec<_> = coordinator
            .download_stream(
                plan(format!("{}/audio.mp3", server.url())),
                dir.path().to_path_buf(),
            )
            .collect()
            .await;

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events.first(),
            Some(DownloadEvent::Failed(AppError::Transfer(_)))
        ));
    }
}
