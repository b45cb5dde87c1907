/// DNAME Resource Record
///
/// Redirects the entire subtree beneath its owner to the target.
///
///[RFC6672 Section 2.1 - The DNAME Resource Record](https://www.rfc-editor.org/rfc/rfc6672#section-2.1)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnameRecord {
    //Target    Absolute name the subtree is translated to
    pub target: String,
}

impl DnameRecord {
    pub fn rdata(&self) -> String {
        self.target.clone()
    }
}
