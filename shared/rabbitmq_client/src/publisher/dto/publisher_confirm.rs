#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherConfirmVariant {
    Ack,
    Nack,
}

#[derive(Debug, Clone, Copy)]
pub struct PublisherConfirm {
    pub delivery_tag: u64,
    pub multiple: bool,
    pub variant: PublisherConfirmVariant,
}

impl PublisherConfirm {
    ///
    /// Checks whether confirm refers to the message published with `delivery_tag`
    ///
    pub fn covers(&self, delivery_tag: u64) -> bool {
        match self.multiple {
            true => delivery_tag <= self.delivery_tag,
            false => delivery_tag == self.delivery_tag,
        }
    }
}
