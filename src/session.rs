use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::binary::{load_binary, save_binary};
use crate::buffer::{FirmwareImage, Provenance};
use crate::ihex::{self, DecodeError, EncodeError, EncodeOptions};

/// ファイル形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    IntelHex,
    Binary,
}

impl ImageFormat {
    /// 拡張子から判定（"hex" で終わる名前は Intel HEX、それ以外はバイナリ）
    pub fn from_path(path: &Path) -> Self {
        let is_hex = path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name.to_ascii_lowercase().ends_with("hex"));
        if is_hex { Self::IntelHex } else { Self::Binary }
    }
}

/// セッションのエラー
#[derive(Debug, Error)]
pub enum SessionError {
    /// ファイルシステムのエラー（存在しない、権限がない等）
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Intel HEX として読めない
    #[error("invalid Intel HEX: {0}")]
    Decode(#[from] DecodeError),
    #[error("cannot write Intel HEX: {0}")]
    Encode(#[from] EncodeError),
    #[error("no file path set")]
    NoPath,
    #[error("no image loaded")]
    NoImage,
}

/// 編集中のファームウェアイメージとそのファイル
///
/// 読み込みに失敗した場合、以前のイメージとパスはそのまま残る。
#[derive(Debug, Default)]
pub struct Session {
    /// ファイルパス
    path: Option<PathBuf>,
    /// 表示中のイメージ
    image: Option<FirmwareImage>,
    /// 変更フラグ
    modified: bool,
    /// Intel HEX 書き出し設定
    encode_options: EncodeOptions,
}

impl Session {
    /// 空のセッションを作成
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encode_options(mut self, options: EncodeOptions) -> Self {
        self.encode_options = options;
        self
    }

    /// ファイルを開く
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<(), SessionError> {
        let path = path.into();
        let bytes = fs::read(&path).map_err(|source| SessionError::Io {
            path: path.clone(),
            source,
        })?;

        let image = match ImageFormat::from_path(&path) {
            ImageFormat::IntelHex => {
                let text = String::from_utf8_lossy(&bytes);
                ihex::decode(&text).inspect_err(|e| warn!("{}: {}", path.display(), e))?
            }
            ImageFormat::Binary => load_binary(&bytes),
        };

        info!(
            "opened {} ({} bytes, {} explicit)",
            path.display(),
            image.len(),
            image.explicit_len()
        );
        self.adopt(image);
        self.path = Some(path);
        Ok(())
    }

    /// Intel HEX テキストから読み込む（パスは変更しない）
    pub fn load_hex_str(&mut self, text: &str) -> Result<(), SessionError> {
        let image = ihex::decode(text)?;
        self.adopt(image);
        Ok(())
    }

    /// バイト列から読み込む（パスは変更しない）
    pub fn load_bytes(&mut self, data: &[u8]) {
        self.adopt(load_binary(data));
    }

    fn adopt(&mut self, image: FirmwareImage) {
        self.image = Some(image);
        self.modified = false;
    }

    /// ファイルに保存
    pub fn save(&mut self) -> Result<(), SessionError> {
        let path = self.path.clone().ok_or(SessionError::NoPath)?;
        self.write_file(&path)
    }

    /// 別名で保存（書き込みに成功した場合のみパスを切り替える）
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), SessionError> {
        let path = path.into();
        self.write_file(&path)?;
        self.path = Some(path);
        Ok(())
    }

    fn write_file(&mut self, path: &Path) -> Result<(), SessionError> {
        let contents = self.serialize(ImageFormat::from_path(path))?;
        fs::write(path, contents).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.modified = false;
        info!("saved {}", path.display());
        Ok(())
    }

    /// 指定形式でバイト列にする
    pub fn serialize(&self, format: ImageFormat) -> Result<Vec<u8>, SessionError> {
        let image = self.image.as_ref().ok_or(SessionError::NoImage)?;
        Ok(match format {
            ImageFormat::IntelHex => ihex::encode(image, &self.encode_options)?.into_bytes(),
            ImageFormat::Binary => save_binary(image),
        })
    }

    /// ユーザー編集による書き込み
    pub fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), SessionError> {
        let image = self.image.as_mut().ok_or(SessionError::NoImage)?;
        image.write(offset, data, Provenance::Explicit);
        self.modified = true;
        Ok(())
    }

    /// 表示中のイメージ
    pub fn image(&self) -> Option<&FirmwareImage> {
        self.image.as_ref()
    }

    /// 変更されているかどうか
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// ファイルパスを取得
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    /// ファイル名を取得
    pub fn filename(&self) -> Option<&str> {
        self.path.as_ref().and_then(|p| p.file_name()).and_then(|s| s.to_str())
    }
}
