use tracing::debug;

use crate::candidate::{SelectedFile, UploadCandidate};
use crate::{MAX_BATCH_SIZE, MAX_FILE_SIZE, RejectReason, SUPPORTED_MIME_TYPES};

/// A file that did not make it into the batch, with the reason.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub file: SelectedFile,
    pub reason: RejectReason,
}

/// Result of validating one selection.
///
/// Every input file lands in exactly one of the two lists.
#[derive(Debug, Default)]
pub struct IntakeOutcome {
    pub accepted: Vec<UploadCandidate>,
    pub rejections: Vec<Rejection>,
}

/// Validates a selection against type, size, and batch-count rules.
///
/// Files are checked in selection order. Once `current_batch_size` plus the
/// accepted count reaches [`MAX_BATCH_SIZE`], every remaining file is
/// rejected as batch-full without further validation.
pub fn accept_selection(selection: Vec<SelectedFile>, current_batch_size: usize) -> IntakeOutcome {
    let mut outcome = IntakeOutcome::default();
    let mut files = selection.into_iter();

    for file in &mut files {
        if current_batch_size + outcome.accepted.len() >= MAX_BATCH_SIZE {
            outcome.rejections.push(Rejection {
                file,
                reason: RejectReason::BatchFull,
            });
            break;
        }

        if !SUPPORTED_MIME_TYPES.contains(&file.mime_type.as_str()) {
            debug!(file = %file.file_name, mime = %file.mime_type, "rejected: unsupported type");
            let reason = RejectReason::UnsupportedType(file.mime_type.clone());
            outcome.rejections.push(Rejection { file, reason });
            continue;
        }

        if file.size() > MAX_FILE_SIZE {
            debug!(file = %file.file_name, size = file.size(), "rejected: oversize");
            let reason = RejectReason::Oversize(file.size());
            outcome.rejections.push(Rejection { file, reason });
            continue;
        }

        outcome.accepted.push(UploadCandidate::new(file));
    }

    // The cap halts validation; the rest of the selection is batch-full.
    for file in files {
        outcome.rejections.push(Rejection {
            file,
            reason: RejectReason::BatchFull,
        });
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(name: &str, size: usize) -> SelectedFile {
        SelectedFile::new(name, "image/jpeg", vec![0u8; size])
    }

    #[test]
    fn accepts_valid_batch_untouched() {
        // Three valid JPEGs under the compression threshold.
        let selection = vec![jpeg("a.jpg", 100), jpeg("b.jpg", 200), jpeg("c.jpg", 300)];
        let outcome = accept_selection(selection, 0);
        assert_eq!(outcome.accepted.len(), 3);
        assert!(outcome.rejections.is_empty());
        assert!(outcome.accepted.iter().all(|c| !c.has_compressed()));
    }

    #[test]
    fn rejects_unsupported_type_keeps_valid() {
        let selection = vec![
            SelectedFile::new("doc.pdf", "application/pdf", vec![0u8; 10]),
            SelectedFile::new("ok.png", "image/png", vec![0u8; 10]),
        ];
        let outcome = accept_selection(selection, 0);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].file_name(), "ok.png");
        assert_eq!(outcome.rejections.len(), 1);
        assert_eq!(
            outcome.rejections[0].reason,
            RejectReason::UnsupportedType("application/pdf".into())
        );
    }

    #[test]
    fn rejects_oversize_file() {
        let selection = vec![jpeg("huge.jpg", (MAX_FILE_SIZE + 1) as usize)];
        let outcome = accept_selection(selection, 0);
        assert!(outcome.accepted.is_empty());
        assert_eq!(
            outcome.rejections[0].reason,
            RejectReason::Oversize(MAX_FILE_SIZE + 1)
        );
    }

    #[test]
    fn batch_cap_rejects_remainder() {
        let selection: Vec<_> = (0..25).map(|i| jpeg(&format!("f{i}.jpg"), 10)).collect();
        let outcome = accept_selection(selection, 0);
        assert_eq!(outcome.accepted.len(), 20);
        assert_eq!(outcome.rejections.len(), 5);
        assert!(
            outcome
                .rejections
                .iter()
                .all(|r| r.reason == RejectReason::BatchFull)
        );
    }

    #[test]
    fn batch_cap_halts_validation() {
        // An oversize file past the cap is rejected as batch-full, not oversize.
        let mut selection: Vec<_> = (0..20).map(|i| jpeg(&format!("f{i}.jpg"), 10)).collect();
        selection.push(jpeg("huge.jpg", (MAX_FILE_SIZE + 1) as usize));
        let outcome = accept_selection(selection, 0);
        assert_eq!(outcome.accepted.len(), 20);
        assert_eq!(outcome.rejections.len(), 1);
        assert_eq!(outcome.rejections[0].reason, RejectReason::BatchFull);
    }

    #[test]
    fn cap_accounts_for_existing_batch() {
        let selection: Vec<_> = (0..5).map(|i| jpeg(&format!("f{i}.jpg"), 10)).collect();
        let outcome = accept_selection(selection, 18);
        assert_eq!(outcome.accepted.len(), 2);
        assert_eq!(outcome.rejections.len(), 3);
    }

    #[test]
    fn every_file_is_accounted_for() {
        let selection = vec![
            jpeg("a.jpg", 10),
            SelectedFile::new("b.gif", "image/gif", vec![0u8; 10]),
            jpeg("c.jpg", (MAX_FILE_SIZE + 1) as usize),
            SelectedFile::new("d.webp", "image/webp", vec![0u8; 10]),
        ];
        let total = selection.len();
        let outcome = accept_selection(selection, 0);
        assert_eq!(outcome.accepted.len() + outcome.rejections.len(), total);
    }

    #[test]
    fn empty_selection() {
        let outcome = accept_selection(Vec::new(), 0);
        assert!(outcome.accepted.is_empty());
        assert!(outcome.rejections.is_empty());
    }
}
