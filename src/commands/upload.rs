//! Upload command implementation

use crate::api::{BackendClient, UploadReceipt};
use crate::error::Result;
use std::path::Path;
use tracing::info;

/// Upload one document to the backend for processing
pub async fn cmd_upload(client: &BackendClient, path: &Path) -> Result<UploadReceipt> {
    info!("Uploading {}", path.display());
    let receipt = client.upload(path).await?;
    info!("Upload accepted, file id {}", receipt.file_id);
    Ok(receipt)
}

/// Print the upload acknowledgement
pub fn print_upload_receipt(receipt: &UploadReceipt) {
    let name = receipt.filename.as_deref().unwrap_or("file");
    println!("✓ \"{}\" uploaded successfully", name);
    println!("  File ID: {}", receipt.file_id);
    if let Some(message) = &receipt.message {
        println!("  {}", message);
    }
}
