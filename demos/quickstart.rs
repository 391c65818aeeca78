//! Quick-start examples for the Konfuzio Rust client.
//!
//! Run with:
//!   KONFUZIO_TOKEN=... KONFUZIO_PROJECT=46 cargo run --example quickstart
//!
//! Or log in with a username and password (see step 1).

use konfuzio::{
    AnnotationDeletion, DatasetStatus, DocumentUpload, FileVersion, NewAnnotation, NewLabel,
    SessionBuilder,
};

#[tokio::main]
async fn main() -> konfuzio::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Create a session (reads KONFUZIO_TOKEN and KONFUZIO_HOST)
    // -----------------------------------------------------------------------
    let session = SessionBuilder::new().build()?;

    // Or exchange credentials for a token:
    // let session = konfuzio::Session::login(
    //     "https://app.konfuzio.com",
    //     konfuzio::Credentials::new("me@example.com", "secret"),
    // ).await?;

    let project_id: i64 = std::env::var("KONFUZIO_PROJECT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(46);

    // -----------------------------------------------------------------------
    // 2. Projects and documents
    // -----------------------------------------------------------------------
    for project in session.list_projects().await? {
        println!("Project {}: {}", project.id, project.name);
    }

    let documents = session.get_meta_of_files(project_id).await?;
    for doc in &documents {
        println!(
            "  {} | {:?} | {:?}",
            doc.id, doc.dataset_status, doc.data_file_name
        );
    }
    println!();

    // -----------------------------------------------------------------------
    // 3. Upload a file into the training set and fetch it back
    // -----------------------------------------------------------------------
    let opts = DocumentUpload {
        project_id,
        dataset_status: DatasetStatus::Training,
        ..Default::default()
    };
    let doc = session.upload_file("invoice.pdf", &opts).await?;
    println!("Uploaded document {}", doc.id);

    let pdf = session.download_file(doc.id, FileVersion::Original).await?;
    println!("Downloaded {} bytes", pdf.len());

    // -----------------------------------------------------------------------
    // 4. Labels and annotations
    // -----------------------------------------------------------------------
    let label_set_id = 63;
    let label_id = session
        .create_label(project_id, &NewLabel::new("Total amount", vec![label_set_id]))
        .await?;

    let annotation = NewAnnotation {
        confidence: Some(0.92),
        ..NewAnnotation::new(label_id, label_set_id).with_offsets(120, 128)
    };
    let created = session.post_annotation(doc.id, project_id, &annotation).await?;
    println!("Created annotation {}", created["id"]);

    if let Some(id) = created["id"].as_i64() {
        match session.delete_annotation(doc.id, id, project_id).await? {
            AnnotationDeletion::Deleted => println!("Annotation deleted"),
            AnnotationDeletion::Replaced { new_annotation_id } => {
                println!("Annotation replaced by {new_annotation_id}")
            }
        }
    }

    // -----------------------------------------------------------------------
    // 5. Clean up
    // -----------------------------------------------------------------------
    session.delete_file(doc.id).await?;
    println!("Deleted document {}", doc.id);

    Ok(())
}
