use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("model file not found: {0}")]
    Missing(PathBuf),
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Where to look for a model file.
pub struct ModelSource<'a> {
    pub name: &'a str,
    pub url: &'a str,
    /// User-supplied path. When set, nothing else is consulted.
    pub explicit: Option<&'a Path>,
    pub bundled_dir: Option<&'a Path>,
}

/// Resolve a model file, downloading it into the user cache as a last resort.
///
/// Resolution order:
/// 1. Explicit path (must exist)
/// 2. User cache directory
/// 3. Bundled directory
/// 4. Download from URL to cache
pub fn resolve(
    source: &ModelSource<'_>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    if let Some(path) = source.explicit {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(ModelResolveError::Missing(path.to_path_buf()))
        };
    }
    resolve_in(&model_cache_dir()?, source, progress)
}

fn resolve_in(
    cache_dir: &Path,
    source: &ModelSource<'_>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cached_path = cache_dir.join(source.name);
    if cached_path.exists() {
        return Ok(cached_path);
    }

    if let Some(dir) = source.bundled_dir {
        let bundled_path = dir.join(source.name);
        if bundled_path.exists() {
            return Ok(bundled_path);
        }
    }

    fs::create_dir_all(cache_dir).map_err(ModelResolveError::CacheDir)?;
    log::info!("Downloading {} from {}", source.name, source.url);
    download(source.url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/FaceLock/models/`
/// - Linux: `$XDG_CACHE_HOME/FaceLock/models/` or `~/.cache/FaceLock/models/`
/// - Windows: `%LOCALAPPDATA%/FaceLock/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("FaceLock").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("FaceLock").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

/// `models/` next to the running executable, where packaged builds ship
/// the model.
pub fn bundled_model_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join("models"))
}

/// Streams `url` into `dest` through a `.part` file, renamed on success.
fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let temp_path = dest.with_extension("part");
    let result = download_inner(url, dest, &temp_path, progress);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelResolveError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let mut file = fs::File::create(temp_path).map_err(write_err(temp_path))?;
    let mut downloaded: u64 = 0;
    let mut buf = vec![0u8; 1024 * 1024];
    loop {
        let n = response.read(&mut buf).map_err(write_err(temp_path))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_err(temp_path))?;
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(write_err(temp_path))?;
    drop(file);

    fs::rename(temp_path, dest).map_err(write_err(dest))?;
    Ok(())
}

fn write_err(path: &Path) -> impl FnOnce(std::io::Error) -> ModelResolveError {
    let path = path.to_path_buf();
    move |source| ModelResolveError::Write { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const UNREACHABLE: &str = "http://invalid.nonexistent.example.com/model.onnx";

    fn source<'a>(explicit: Option<&'a Path>, bundled: Option<&'a Path>) -> ModelSource<'a> {
        ModelSource {
            name: "face.onnx",
            url: UNREACHABLE,
            explicit,
            bundled_dir: bundled,
        }
    }

    #[test]
    fn test_explicit_path_is_returned_when_present() {
        let tmp = TempDir::new().unwrap();
        let model = tmp.path().join("custom.onnx");
        fs::write(&model, b"model").unwrap();

        let resolved = resolve(&source(Some(&model), None), None).unwrap();
        assert_eq!(resolved, model);
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let model = tmp.path().join("absent.onnx");

        let err = resolve(&source(Some(&model), None), None).unwrap_err();
        assert!(matches!(err, ModelResolveError::Missing(p) if p == model));
    }

    #[test]
    fn test_cached_file_wins_over_bundled() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        let bundled = tmp.path().join("bundled");
        fs::create_dir_all(&cache).unwrap();
        fs::create_dir_all(&bundled).unwrap();
        fs::write(cache.join("face.onnx"), b"cached").unwrap();
        fs::write(bundled.join("face.onnx"), b"bundled").unwrap();

        let resolved = resolve_in(&cache, &source(None, Some(&bundled)), None).unwrap();
        assert_eq!(resolved, cache.join("face.onnx"));
    }

    #[test]
    fn test_bundled_file_used_when_cache_empty() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        let bundled = tmp.path().join("bundled");
        fs::create_dir_all(&bundled).unwrap();
        fs::write(bundled.join("face.onnx"), b"bundled").unwrap();

        let resolved = resolve_in(&cache, &source(None, Some(&bundled)), None).unwrap();
        assert_eq!(resolved, bundled.join("face.onnx"));
    }

    #[test]
    fn test_model_cache_dir_is_app_scoped() {
        let path = model_cache_dir().unwrap();
        assert!(path.to_string_lossy().contains("FaceLock"));
        assert!(path.ends_with("models"));
    }

    #[test]
    fn test_failed_download_leaves_no_partial_file() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("model.onnx");
        assert!(download(UNREACHABLE, &dest, None).is_err());
        assert!(!dest.exists());
        assert!(!dest.with_extension("part").exists());
    }
}
