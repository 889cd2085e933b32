use aes::Aes128;
use magma::Magma;
use tctr::{Ctr128, Ctr64, Lrw};

fn sectors() -> Result<(), tctr::Error> {
    let key = b"an example very very secret key.";
    let mut ctr = Ctr128::<Lrw<Aes128>>::new();
    println!("backend: {}", ctr.backend_name().unwrap_or("none"));

    let mut disk = *b"sector zero data and sector one data....";
    for (index, sector) in disk.chunks_mut(20).enumerate() {
        ctr.set_tweaked_key(&key[..16])?;
        ctr.set_tweak(Some(&(index as u64).to_be_bytes()))?;
        ctr.set_counter(None)?;
        ctr.apply_keystream(sector)?;
    }

    for (index, sector) in disk.chunks_mut(20).enumerate() {
        ctr.set_tweak(Some(&(index as u64).to_be_bytes()))?;
        ctr.set_counter(None)?;
        ctr.apply_keystream(sector)?;
    }
    assert_eq!(&disk, b"sector zero data and sector one data....");

    ctr.cleanup();
    Ok(())
}

fn stream() -> Result<(), tctr::Error> {
    let mut ctr = Ctr64::<Lrw<Magma>>::new();
    ctr.set_key(b"an example very very secret key.")?;
    ctr.set_counter(Some(&[0x12, 0x34, 0x56, 0x78]))?;

    let message = b"plaintext message split across several writes";
    let mut ciphertext = vec![0u8; message.len()];
    for (input, output) in message.chunks(7).zip(ciphertext.chunks_mut(7)) {
        ctr.apply_keystream_b2b(input, output)?;
    }

    ctr.set_counter(Some(&[0x12, 0x34, 0x56, 0x78]))?;
    ctr.apply_keystream(&mut ciphertext)?;
    assert_eq!(&ciphertext[..], &message[..]);

    ctr.cleanup();
    Ok(())
}

fn main() {
    if let Err(err) = sectors().and_then(|_| stream()) {
        eprintln!("demo failed: {}", err);
        std::process::exit(1);
    }
}
