//! Unit tests for identification requests

use std::sync::Arc;

use flora_domain::constants::MAX_IMAGE_BYTES;
use flora_domain::error::Error;
use flora_domain::value_objects::{
    ContentKey, IdentificationOption, IdentificationOptions, IdentificationRequest,
};

#[test]
fn test_request_derives_content_key() {
    let options = IdentificationOptions::new().with(IdentificationOption::CareDetails);
    let request =
        IdentificationRequest::new(b"jpeg-bytes".to_vec(), options.clone()).expect("valid request");

    assert_eq!(request.image(), b"jpeg-bytes");
    assert_eq!(request.options(), &options);
    assert_eq!(
        request.content_key(),
        &ContentKey::derive(b"jpeg-bytes", &options)
    );
}

#[test]
fn test_empty_image_rejected() {
    let result = IdentificationRequest::new(Vec::new(), IdentificationOptions::new());
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
}

#[test]
fn test_oversized_image_rejected() {
    let image = vec![0u8; MAX_IMAGE_BYTES + 1];
    let result = IdentificationRequest::new(image, IdentificationOptions::new());
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
}

#[test]
fn test_image_at_limit_accepted() {
    let image = vec![7u8; MAX_IMAGE_BYTES];
    assert!(IdentificationRequest::new(image, IdentificationOptions::new()).is_ok());
}

#[test]
fn test_clones_share_image() {
    let request = IdentificationRequest::new(b"leaf".to_vec(), IdentificationOptions::new())
        .expect("valid request");
    let copy = request.clone();
    assert!(Arc::ptr_eq(&request.shared_image(), &copy.shared_image()));
}
