use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::captcha::{DatasetStats, TrainingSample};
use crate::infrastructure::error::AppResult;

/// Jeu de données d'entraînement sur disque:
/// `images/<id>.png` et `annotations/<id>.json`
#[derive(Debug, Clone)]
pub struct CaptchaDataset {
    root: PathBuf,
}

impl CaptchaDataset {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    fn annotations_dir(&self) -> PathBuf {
        self.root.join("annotations")
    }

    /// Écrit l'image et son annotation; les dossiers sont créés au besoin
    pub async fn save(&self, sample: &TrainingSample, image: &[u8]) -> AppResult<()> {
        tokio::fs::create_dir_all(self.images_dir()).await?;
        tokio::fs::create_dir_all(self.annotations_dir()).await?;

        tokio::fs::write(self.images_dir().join(&sample.image_file), image).await?;
        let annotation = serde_json::to_vec_pretty(sample)?;
        tokio::fs::write(
            self.annotations_dir().join(format!("{}.json", sample.id)),
            annotation,
        )
        .await?;

        info!(sample_id = %sample.id, "🖼️ Échantillon captcha enregistré");
        Ok(())
    }

    pub async fn stats(&self) -> AppResult<DatasetStats> {
        Ok(DatasetStats {
            images: count_files(&self.images_dir(), "png").await?,
            annotations: count_files(&self.annotations_dir(), "json").await?,
        })
    }
}

async fn count_files(dir: &Path, extension: &str) -> AppResult<usize> {
    if !tokio::fs::try_exists(dir).await? {
        return Ok(0);
    }
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut count = 0;
    while let Some(entry) = entries.next_entry().await? {
        if entry.path().extension().and_then(|e| e.to_str()) == Some(extension) {
            count += 1;
        }
    }
    Ok(count)
}
